use thiserror::Error;

/// Result type alias using SchemaGraphError
pub type Result<T> = std::result::Result<T, SchemaGraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Only broken schema definitions are errors. Readonly writes, rejected
/// values, unresolved ids and missing owners are ordinary outcomes and are
/// reported through return values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Registration
    InvalidInput,
    CycleDetected,
    IllegalReparent,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::IllegalReparent => "ERR_ILLEGAL_REPARENT",
        }
    }
}

/// Canonical structured error type
///
/// Carries a stable kind plus optional context for logging and for callers
/// that want to handle errors programmatically.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (category id, property id or schema name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Hard failures raised while building categories and schemas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaGraphError {
    /// An id or schema name is empty or whitespace-only
    #[error("Invalid {what} id: {reason}")]
    InvalidId { what: &'static str, reason: String },

    /// Assigning `based_on` would make the category its own ancestor
    #[error("Cycle detected: category {category_id} cannot be based on {based_on_id}")]
    CategoryCycle {
        category_id: String,
        based_on_id: String,
    },

    /// Adding the schema would place it beneath itself
    #[error("Cycle detected: schema {child} cannot be added beneath {parent}")]
    SchemaCycle { parent: String, child: String },

    /// The schema already belongs to another parent schema
    #[error("Illegal reparent: schema {child} already has parent {current_parent}")]
    IllegalReparent {
        child: String,
        current_parent: String,
    },
}

impl SchemaGraphError {
    pub(crate) fn empty_id(what: &'static str) -> Self {
        SchemaGraphError::InvalidId {
            what,
            reason: "id cannot be empty or whitespace-only".to_string(),
        }
    }
}

/// Reject empty and whitespace-only ids at registration time
pub(crate) fn ensure_id(what: &'static str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(SchemaGraphError::empty_id(what));
    }
    Ok(())
}

impl From<SchemaGraphError> for ExError {
    fn from(err: SchemaGraphError) -> Self {
        match err {
            SchemaGraphError::InvalidId { what, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_message(format!("Invalid {} id: {}", what, reason))
            }

            SchemaGraphError::CategoryCycle {
                category_id,
                based_on_id,
            } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(category_id)
                .with_op("set_based_on")
                .with_message(format!("Basing on {} would create a cycle", based_on_id)),

            SchemaGraphError::SchemaCycle { parent, child } => {
                ExError::new(ExErrorKind::CycleDetected)
                    .with_entity_id(child)
                    .with_op("add_schema")
                    .with_message(format!("Schema would become a descendant of itself via {}", parent))
            }

            SchemaGraphError::IllegalReparent {
                child,
                current_parent,
            } => ExError::new(ExErrorKind::IllegalReparent)
                .with_entity_id(child)
                .with_op("add_schema")
                .with_message(format!("Schema already has parent {}", current_parent)),
        }
    }
}
