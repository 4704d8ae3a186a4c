//! # Spotify Integration Module
//!
//! This module is the relay's only gateway to Spotify's services. It covers
//! the two upstream surfaces the relay talks to:
//!
//! - [`auth`] - the accounts service: building the user-facing authorization
//!   URL and exchanging an authorization code for tokens using HTTP Basic
//!   client authentication
//! - [`player`] - the Web API: read-only playback lookups (currently
//!   playing, recently played) with a typed three-way outcome
//!
//! ## Design
//!
//! The client is a pure pass-through. It never retries (authorization codes
//! are single-use and short-lived; data-call failures may mean a legitimately
//! stale token), never mutates stored state, and leaves response-shape
//! normalization to the handlers. A successful data call yields the raw JSON
//! payload; "nothing to report" (HTTP 204) is a distinct outcome, not an
//! error.
//!
//! ## API Coverage
//!
//! - `POST {token_url}` - authorization-code exchange
//! - `GET /me/player/currently-playing` - current playback
//! - `GET /me/player/recently-played` - listening history
//!
//! All endpoint base URLs come from the injected [`crate::config::Config`],
//! so tests can point the client at a local stub server.

pub mod auth;
pub mod player;
