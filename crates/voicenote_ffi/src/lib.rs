//! Flutter-facing bridge over `voicenote_core`.

pub mod api;
