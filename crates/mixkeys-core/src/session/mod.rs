mod backend;
mod directory;
mod discovery;

pub use {
    backend::{AudioBackend, AudioSession, SessionHandle},
    directory::SessionDirectory,
    discovery::SessionDiscovery,
};
