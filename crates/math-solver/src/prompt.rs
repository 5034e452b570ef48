//! Prompt Templates
//!
//! Fixed natural-language prompts the solver ships with: the tutor policy,
//! the templates behind the two LLM-backed tools, the session greeting, and
//! the canned example problems.

/// A fixed template with a single `{question}` slot.
#[derive(Clone, Copy, Debug)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    pub fn render(&self, question: &str) -> String {
        self.template.replace("{question}", question)
    }
}

/// Template behind the calculator tool. Arithmetic correctness is entirely
/// the remote model's responsibility.
pub const CALCULATOR_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r"You are a precise calculator. Evaluate the following mathematical expression and reply with the numeric result only, no commentary:

{question}",
);

/// Template behind the step-by-step reasoning tool.
pub const REASONING_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r"You're an expert mathematics teacher. Solve the following problem step by step:

{question}

First, identify what information is given and what is being asked.
Then, lay out a clear strategy for solving the problem.
Show your work carefully, with each step clearly labeled.
Provide a final answer with appropriate units if applicable.

Your solution:",
);

/// System prompt for the math tutor agent.
pub const MATH_TUTOR_PROMPT: &str = r"You are an expert mathematics tutor and problem solver. Your goal is to:
1. Solve mathematical problems accurately
2. Provide clear, step-by-step explanations
3. Use the appropriate tools for calculations and information gathering
4. Organize your answers in a structured format with headings
5. Include formulas and equations where relevant

For math problems, always show your work and explain your thinking.
For information queries, cite your sources where appropriate.";

/// Canned assistant greeting every new session starts with.
pub const GREETING: &str =
    "Hi, I'm your Math Problem Solver! Ask me any math question or problem, and I'll solve it step-by-step.";

/// Example problems offered in the UI.
pub const EXAMPLE_PROBLEMS: [&str; 4] = [
    "Solve for x: 2x + 5 = 15",
    "Find the area of a circle with radius 4 cm",
    "If a train travels at 60 mph and takes 3 hours to reach its destination, how far did it travel?",
    "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. Then I buy a dozen apples and 2 packs of blueberries. Each pack contains 25 berries. How many total pieces of fruit do I have at the end?",
];
