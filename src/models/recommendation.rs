use serde::Serialize;
use serde_json::Value;

/// Maximum length of a product name, matching the `VARCHAR(128)` columns.
pub const PRODUCT_NAME_MAX_LEN: usize = 128;

/// Errors raised while reading a recommendation out of a request body
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DataValidationError {
    #[error("Invalid Recommendation: body of request contained bad or no data")]
    NotAnObject,

    #[error("Invalid Recommendation: missing {0}")]
    Missing(&'static str),

    #[error("Invalid Recommendation: {field} {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// A pairing of two products with a recommendation type code and a like counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Recommendation {
    /// Assigned by the store on insert, `None` until then
    pub id: Option<i32>,
    pub product_a: String,
    pub product_b: String,
    pub recom_type: String,
    pub likes: i32,
}

impl Default for Recommendation {
    fn default() -> Self {
        Self {
            id: None,
            product_a: String::new(),
            product_b: String::new(),
            recom_type: String::new(),
            likes: 0,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Recommendation {:?} id=[{}]>", self.product_a, id),
            None => write!(f, "<Recommendation {:?} id=[None]>", self.product_a),
        }
    }
}

impl Recommendation {
    /// Creates an unsaved recommendation with no likes
    pub fn new(
        product_a: impl Into<String>,
        product_b: impl Into<String>,
        recom_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            product_a: product_a.into(),
            product_b: product_b.into(),
            recom_type: recom_type.into(),
            likes: 0,
        }
    }

    /// Serializes the recommendation into its flat wire representation
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "product_a": self.product_a,
            "product_b": self.product_b,
            "recom_type": self.recom_type,
            "likes": self.likes,
        })
    }

    /// Builds a new, unsaved recommendation from a request body
    pub fn from_json(data: &Value) -> Result<Self, DataValidationError> {
        let mut recommendation = Self::default();
        recommendation.deserialize(data)?;
        Ok(recommendation)
    }

    /// Reads the wire fields of `data` into this recommendation.
    ///
    /// `id` in the body is ignored. Required keys are checked in the order
    /// `product_a`, `product_b`, `recom_type` and the first one missing is
    /// reported. `likes` is optional and keeps its current value when absent.
    /// Nothing is modified unless the whole body is valid.
    pub fn deserialize(&mut self, data: &Value) -> Result<&mut Self, DataValidationError> {
        let object = data.as_object().ok_or(DataValidationError::NotAnObject)?;

        let product_a = required_str(object, "product_a")?;
        let product_b = required_str(object, "product_b")?;
        let recom_type = required_str(object, "recom_type")?;
        let likes = optional_likes(object)?;

        check_product_name("product_a", product_a)?;
        check_product_name("product_b", product_b)?;
        if recom_type.chars().count() != 1 {
            return Err(DataValidationError::InvalidField {
                field: "recom_type",
                reason: "must be a single character",
            });
        }

        self.product_a = product_a.to_string();
        self.product_b = product_b.to_string();
        self.recom_type = recom_type.to_string();
        if let Some(likes) = likes {
            self.likes = likes;
        }

        Ok(self)
    }
}

/// Parses a raw request body as JSON; unparseable bodies count as bad data
pub fn parse_body(body: &[u8]) -> Result<Value, DataValidationError> {
    serde_json::from_slice(body).map_err(|_| DataValidationError::NotAnObject)
}

fn required_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DataValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(DataValidationError::Missing(field)),
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(DataValidationError::InvalidField {
            field,
            reason: "must be a string",
        }),
    }
}

fn check_product_name(field: &'static str, name: &str) -> Result<(), DataValidationError> {
    if name.chars().count() > PRODUCT_NAME_MAX_LEN {
        return Err(DataValidationError::InvalidField {
            field,
            reason: "must be at most 128 characters",
        });
    }
    Ok(())
}

/// Coerces `likes` to a non-negative integer; numeric strings are accepted
fn optional_likes(
    object: &serde_json::Map<String, Value>,
) -> Result<Option<i32>, DataValidationError> {
    let invalid = DataValidationError::InvalidField {
        field: "likes",
        reason: "must be a non-negative integer",
    };

    let likes = match object.get("likes") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_i64().ok_or(invalid.clone())?,
        Some(Value::String(text)) => text.trim().parse::<i64>().map_err(|_| invalid.clone())?,
        Some(_) => return Err(invalid),
    };

    i32::try_from(likes)
        .ok()
        .filter(|likes| *likes >= 0)
        .map(Some)
        .ok_or(invalid)
}
