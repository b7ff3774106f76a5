mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from stagescore for tests
pub use stagescore::Session;
