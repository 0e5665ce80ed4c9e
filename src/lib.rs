// Lil' GPT library entry point.
// Exposes every module so main.rs can wire them together and they can be
// tested independently of a running window.

// Shared settings
pub mod settings;

// Managed state + main-thread scheduler
pub mod state;

// Tauri adapters (webviews, tab strip events, menus, tray)
pub mod host;
pub mod menus;

// Pure logic modules (no Tauri imports)
pub mod modules;
