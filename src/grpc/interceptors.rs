use tonic::{
    metadata::{Ascii, MetadataValue},
    Request, Status,
};

pub const RETRY_ATTEMPT_HEADER: &str = "x-retry-attempt";

// extension key struct, zero-based attempt number of the outgoing call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryAttempt(pub u32);

pub type Interceptor = fn(Request<()>) -> Result<Request<()>, Status>;

/// Client interceptor. Called on each outbound request; returning a `Status`
/// cancels the request.
///
/// Copies the attempt number from the request extensions into the
/// `x-retry-attempt` header. First attempts go out unmarked.
pub fn stamp_attempt(mut req: Request<()>) -> Result<Request<()>, Status> {
    let attempt = match req.extensions().get::<RetryAttempt>() {
        Some(RetryAttempt(n)) if *n > 0 => *n,
        _ => return Ok(req),
    };

    let value: MetadataValue<Ascii> = attempt
        .to_string()
        .parse()
        .map_err(|_| Status::internal("unencodable retry attempt"))?;
    req.metadata_mut().insert(RETRY_ATTEMPT_HEADER, value);
    Ok(req)
}
