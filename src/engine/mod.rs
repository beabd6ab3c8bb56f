//! Ferma ⇄ eKomKassa translation engine.
//!
//! Pure, synchronous and free of I/O. Routes feed it parsed input and the
//! current [`request::RequestTime`]; it hands back fully-formed upstream
//! requests and Ferma replies:
//!
//! - `tables`: enumerated code mappings between the two vocabularies
//! - `dispatch`: payload shape detection, operation resolution, upstream paths
//! - `request`: Ferma input → eKomKassa request
//! - `response`: eKomKassa reply → Ferma reply

pub mod dispatch;
pub mod request;
pub mod response;
pub mod tables;
