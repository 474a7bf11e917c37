// Contact acquisition: find one reachable decision-maker at a company.
// Implements: title matching, spam heuristics, candidate scoring, people search,
// likely-title research and the credit-aware acquisition controller.
// All LLM calls go through llm_client; all provider calls go through people_search.

pub mod acquisition;
pub mod handlers;
pub mod intelligence;
pub mod models;
pub mod people_search;
pub mod progress;
pub mod prompts;
pub mod scoring;
pub mod spam;
pub mod title_matcher;
