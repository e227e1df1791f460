pub mod util;
pub mod io_util;
pub mod time_util;
pub mod escape;
pub mod http_response_status_codes;
pub mod webutils;
pub mod config;

pub mod dom;
pub mod content;
pub mod binder;
pub mod renderers;
pub mod form;
pub mod source;
pub mod bootstrap;
pub mod page;
pub mod server;
