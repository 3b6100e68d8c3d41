// Adapters layer: concrete implementations for external systems (settings file, network, terminal).

pub mod connectivity;
pub mod settings;
pub mod terminal;
