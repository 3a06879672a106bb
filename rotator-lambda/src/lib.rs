//! Lambda runtime client for the credential rotator
//!
//! Implements the client side of the Lambda Runtime API used by functions
//! deployed on the `provided` runtimes.

pub mod invocation;
pub mod runtime;

pub use invocation::{Invocation, LambdaContext, LambdaErrorResponse};
pub use runtime::{run, run_once, Handler, RuntimeClient, RuntimeError};
