use std::fmt;

use serde::Deserialize;

/// Identifies a single CCMS monitoring tree element. This is the whole
/// invocation payload; all three fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MteRef {
    pub context_name: String,
    pub object_name: String,
    pub mte_name: String,
}

impl fmt::Display for MteRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // CCMS path notation: Context\Object\Element
        write!(
            f,
            "{}\\{}\\{}",
            self.context_name, self.object_name, self.mte_name
        )
    }
}
