//! Solver Toolkit
//!
//! The five tools the math agent works with, in their fixed lineup order:
//! encyclopedia lookup, academic-paper lookup, web search, calculator, and
//! step-by-step reasoning.

mod arxiv;
mod calculator;
mod reasoning;
mod web_search;
mod wikipedia;

pub use arxiv::ArxivTool;
pub use calculator::CalculatorTool;
pub use reasoning::MathReasoningTool;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;
