//! In-page capture probes: small scripts evaluated in the page context that
//! return plain JSON, built on the console- and evaluate-bridging patterns
//! of the original `metrics::web_vitals` / `metrics::custom` modules.

pub mod cwv;
pub mod longtask;
pub mod resources;
pub mod ssr;
pub mod timing;
