// Module exports for pure logic
pub mod surface;             // Content surface contract + events
pub mod viewport;            // Single mounted surface below the tab bar
pub mod sync;                // Tab strip payloads and back-channel commands
pub mod tabs;                // Tab registry
pub mod find;                // In-page find scripts
pub mod chrome;              // Menu / tray model
pub mod mailbox;             // Re-entrant-safe job queue

#[cfg(test)]
pub(crate) mod testing;      // Fake surfaces and tab strip for unit tests
