//! Built-in knowledge base used when no solutions file is configured.

use crate::store::Solution;

fn doc(
    title: &str,
    description: &str,
    solution: &str,
    code_example: &str,
    source: &str,
    tags: &[&str],
    keywords: &[&str],
) -> Solution {
    Solution {
        title: title.into(),
        description: description.into(),
        solution: solution.into(),
        code_example: code_example.into(),
        source: source.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Curated React issue/solution pairs.
pub fn default_solutions() -> Vec<Solution> {
    vec![
        doc(
            "Fix React State Mutation",
            "React component not updating when state changes. Direct mutation of state \
             objects/arrays doesn't trigger re-renders.",
            "React doesn't detect direct state mutations. You need to create new objects/arrays \
             to trigger re-renders. Use the spread operator or create new instances.",
            "// ❌ Direct mutation\ntodos.push(item);\nsetTodos(todos);\n\n\
             // ✅ New array\nsetTodos([...todos, item]);",
            "React Documentation - State Updates",
            &["react", "state", "mutation", "hooks"],
            &["state", "update", "mutation", "re-render", "useState"],
        ),
        doc(
            "Fix useEffect Infinite Loop",
            "useEffect hook running infinitely, causing performance issues and potential crashes.",
            "useEffect runs when dependencies change. If you're setting state inside useEffect \
             without proper dependencies, it can create infinite loops. Add missing dependencies \
             or use useCallback/useMemo.",
            "// ❌ Infinite loop\nuseEffect(() => {\n  setCount(count + 1);\n}, []);\n\n\
             // ✅ Proper dependency\nuseEffect(() => {\n  setCount(prev => prev + 1);\n}, []);",
            "React Hooks Documentation",
            &["react", "useEffect", "hooks", "infinite-loop"],
            &["useEffect", "infinite", "loop", "dependency", "hooks"],
        ),
        doc(
            "Fix Event Handler Binding",
            "Event handlers not working properly, especially in loops or when passing functions \
             as props.",
            "Event handlers need proper binding or should be defined as arrow functions to \
             preserve 'this' context. Use arrow functions or bind methods properly.",
            "// ❌ Loses context\n<button onClick={this.handleClick}>Click</button>\n\n\
             // ✅ Arrow function preserves context\n\
             <button onClick={() => this.handleClick()}>Click</button>",
            "React Event Handling Documentation",
            &["react", "events", "binding", "handlers"],
            &["event", "handler", "binding", "onClick", "context"],
        ),
    ]
}
