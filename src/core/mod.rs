pub mod analyzer;
pub mod scanner;

pub use analyzer::{Analysis, DependencyAnalyzer};
pub use scanner::FileScanner;
