//! error taxonomies for the server and bouncer client.

/// errors raised while resolving or mutating game/user state.
#[derive(Debug, Clone)]
pub enum GameError {
    BadArg(String),
    NotFound(String),
    StoreFailure(String),
    GameFinished,
    NoPendingPatron,
    WrongPerson { expected: u32, got: u32 },
    BadGoalProgram(String),
    InvalidArity(usize),
    ProtocolError(String),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadArg(name) => write!(f, "bad or missing arg {}", name),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::StoreFailure(msg) => write!(f, "store failure: {}", msg),
            Self::GameFinished => write!(f, "game finished"),
            Self::NoPendingPatron => write!(f, "no pending patron"),
            Self::WrongPerson { .. } => write!(f, "wrong person"),
            Self::BadGoalProgram(msg) => write!(f, "bad goal program: {}", msg),
            Self::InvalidArity(n) => write!(f, "invalid arity: {}", n),
            Self::ProtocolError(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

/// errors raised by the bouncer client while talking to the server.
#[derive(Debug, Clone)]
pub enum ClientError {
    NetworkFailure(String),
    ParseFailure(String),
    Protocol(GameError),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkFailure(msg) => write!(f, "network failure: {}", msg),
            Self::ParseFailure(msg) => write!(f, "parse failure: {}", msg),
            Self::Protocol(e) => write!(f, "protocol error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<GameError> for ClientError {
    fn from(e: GameError) -> Self {
        Self::Protocol(e)
    }
}
