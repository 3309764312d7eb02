mod request_id;

pub use request_id::{attach_request_id, request_span, RequestId, REQUEST_ID_HEADER};
