//! One module per artifact kind, each holding its anchor signatures, its
//! empirically tuned window constants and its walk plan. The windows were
//! calibrated against memory layouts of a specific browser build and may
//! need recalibration for newer builds.

pub mod activity;
pub mod browser_request;
pub mod corpus;
pub mod http_request;
pub mod socks_request;
pub mod tab_session;
