//! The HTTP response status codes this site deals with.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResponseStatusCode {
    OK200,
    BadRequest400,
    Forbidden403,
    NotFound404,
    MethodNotAllowed405,
    InternalServerError500,
    BadGateway502,
}

const ALL: &[HttpResponseStatusCode] = {
    use HttpResponseStatusCode::*;
    &[OK200, BadRequest400, Forbidden403, NotFound404,
      MethodNotAllowed405, InternalServerError500, BadGateway502]
};

impl HttpResponseStatusCode {
    pub fn code(self) -> u16 {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => 200,
            BadRequest400 => 400,
            Forbidden403 => 403,
            NotFound404 => 404,
            MethodNotAllowed405 => 405,
            InternalServerError500 => 500,
            BadGateway502 => 502,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        ALL.iter().copied().find(|s| s.code() == code)
    }

    pub fn title(self) -> &'static str {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => "OK",
            BadRequest400 => "Bad Request",
            Forbidden403 => "Forbidden",
            NotFound404 => "Not Found",
            MethodNotAllowed405 => "Method Not Allowed",
            InternalServerError500 => "Internal Server Error",
            BadGateway502 => "Bad Gateway",
        }
    }

    pub fn desc(self) -> &'static str {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => "The request succeeded.",
            BadRequest400 => "The server could not understand the request.",
            Forbidden403 => "You do not have access rights to this content.",
            NotFound404 => "The requested resource could not be found.",
            MethodNotAllowed405 => "The request method is not supported for this resource.",
            InternalServerError500 => "The server encountered a situation it does not know \
                                       how to handle.",
            BadGateway502 => "The server got an invalid response from upstream.",
        }
    }
}

/// 2xx
pub fn is_success_code(code: u16) -> bool {
    (200..300).contains(&code)
}
