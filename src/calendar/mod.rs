//! Calendar digest source

pub mod client;

pub use client::{CalendarSource, GoogleCalendarClient, TokenProvider, token_provider_for};
