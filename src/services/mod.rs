pub mod evaluator;
pub mod plagiarism;
pub mod result_parser;
pub mod scheduler;
pub mod store;
pub mod verdict;
