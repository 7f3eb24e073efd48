// `config` module:
// Defines the persisted `Settings`, the `SettingsProvider` trait and its
// file-backed (`SettingsManager`) and in-memory (`MemorySettings`)
// implementations, plus healing of malformed settings and export.
pub mod config;

// `engine` module:
// The lifecycle controller. Owns the settings, runs the apply/retract cycle,
// exposes the command surface and debounces tree refresh signals.
pub mod engine;

// `host` module:
// The traits the host environment implements (tree, style sink, notifier)
// and in-memory implementations of each.
pub mod host;
