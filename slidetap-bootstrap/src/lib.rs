// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! `slidetap-bootstrap` - the process entry point: CLI parsing, the
//! composition root that wires `slidetap-domain`/`slidetap-app` into one
//! [`slidetap_app::Engine`], signal handling, and exit-code mapping. Sits
//! outside the domain/application layering the way the teacher's
//! `bootstrap` crate sits outside `adaptive_pipeline`'s enterprise layers:
//! enterprise code never depends back on this crate.

pub mod cli;
pub mod composition;
pub mod demo;
pub mod exit_code;
pub mod signals;
pub mod validator;
