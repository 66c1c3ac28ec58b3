//! Consolidated message codes and classification system
//!
//! Single source of truth for every code the engine reports: the `ELnnnnE`
//! parse and evaluation codes, system codes, and the `Innn` success codes
//! used by the log events. Each code carries its metadata, including the
//! message template whose `{0}`, `{1}` ... slots are filled with the
//! insertion arguments of the error that reports it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const NOT_AN_INTEGER: Code = Code::new("EL1035E");
    pub const NOT_A_LONG: Code = Code::new("EL1036E");
    pub const NOT_A_REAL: Code = Code::new("EL1037E");
    pub const NON_TERMINATING_DOUBLE_QUOTED_STRING: Code = Code::new("EL1045E");
    pub const NON_TERMINATING_QUOTED_STRING: Code = Code::new("EL1046E");
    pub const MISSING_LEADING_ZERO_FOR_NUMBER: Code = Code::new("EL1047E");
    pub const REAL_CANNOT_BE_LONG: Code = Code::new("EL1048E");
    pub const UNEXPECTED_ESCAPE_CHAR: Code = Code::new("EL1065E");
    pub const MISSING_CHARACTER: Code = Code::new("EL1068E");
    pub const UNSUPPORTED_CHARACTER: Code = Code::new("EL1069E");
    pub const MAX_EXPRESSION_LENGTH_EXCEEDED: Code = Code::new("EL1079E");
    pub const MAX_TOKEN_COUNT_EXCEEDED: Code = Code::new("EL1080E");
    pub const STRING_LITERAL_TOO_LARGE: Code = Code::new("EL1081E");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("EL1084E");
}

/// Parser error codes
pub mod syntax {
    use super::Code;

    pub const MORE_INPUT: Code = Code::new("EL1041E");
    pub const RIGHT_OPERAND_PROBLEM: Code = Code::new("EL1042E");
    pub const NOT_EXPECTED_TOKEN: Code = Code::new("EL1043E");
    pub const OOD: Code = Code::new("EL1044E");
    pub const UNEXPECTED_DATA_AFTER_DOT: Code = Code::new("EL1049E");
    pub const MISSING_CONSTRUCTOR_ARGS: Code = Code::new("EL1050E");
    pub const RUN_OUT_OF_ARGUMENTS: Code = Code::new("EL1051E");
    pub const LEFT_OPERAND_PROBLEM: Code = Code::new("EL1053E");
    pub const INVALID_BEAN_REFERENCE: Code = Code::new("EL1070E");
    pub const MISSING_SELECTION_EXPRESSION: Code = Code::new("EL1071E");
    pub const MAX_PARSE_DEPTH_EXCEEDED: Code = Code::new("EL1082E");
    pub const TOO_MANY_ARGUMENTS: Code = Code::new("EL1085E");
}

/// Evaluation error codes
pub mod evaluation {
    use super::Code;

    pub const TYPE_CONVERSION_ERROR: Code = Code::new("EL1001E");
    pub const CONSTRUCTOR_NOT_FOUND: Code = Code::new("EL1002E");
    pub const METHOD_NOT_FOUND: Code = Code::new("EL1004E");
    pub const TYPE_NOT_FOUND: Code = Code::new("EL1005E");
    pub const FUNCTION_NOT_DEFINED: Code = Code::new("EL1006E");
    pub const PROPERTY_OR_FIELD_NOT_READABLE_ON_NULL: Code = Code::new("EL1007E");
    pub const PROPERTY_OR_FIELD_NOT_READABLE: Code = Code::new("EL1008E");
    pub const PROPERTY_OR_FIELD_NOT_WRITABLE_ON_NULL: Code = Code::new("EL1009E");
    pub const PROPERTY_OR_FIELD_NOT_WRITABLE: Code = Code::new("EL1010E");
    pub const METHOD_CALL_ON_NULL_OBJECT_NOT_ALLOWED: Code = Code::new("EL1011E");
    pub const CANNOT_INDEX_INTO_NULL_VALUE: Code = Code::new("EL1012E");
    pub const NOT_COMPARABLE: Code = Code::new("EL1013E");
    pub const INCORRECT_NUMBER_OF_ARGUMENTS_TO_FUNCTION: Code = Code::new("EL1015E");
    pub const FUNCTION_REFERENCE_CANNOT_BE_INVOKED: Code = Code::new("EL1016E");
    pub const COLLECTION_INDEX_OUT_OF_BOUNDS: Code = Code::new("EL1025E");
    pub const INDEXING_NOT_SUPPORTED_FOR_TYPE: Code = Code::new("EL1027E");
    pub const EXCEPTION_DURING_METHOD_INVOCATION: Code = Code::new("EL1029E");
    pub const OPERATOR_NOT_SUPPORTED_BETWEEN_TYPES: Code = Code::new("EL1030E");
    pub const INVALID_TYPE_FOR_SELECTION: Code = Code::new("EL1033E");
    pub const PROJECTION_NOT_SUPPORTED_ON_TYPE: Code = Code::new("EL1034E");
    pub const UNABLE_TO_GROW_COLLECTION: Code = Code::new("EL1052E");
    pub const NOT_ASSIGNABLE: Code = Code::new("EL1055E");
    pub const NO_BEAN_RESOLVER_REGISTERED: Code = Code::new("EL1057E");
    pub const EXCEPTION_DURING_BEAN_RESOLUTION: Code = Code::new("EL1058E");
    pub const RESULT_OF_SELECTION_CRITERIA_IS_NOT_BOOLEAN: Code = Code::new("EL1060E");
    pub const MISSING_ARRAY_DIMENSION: Code = Code::new("EL1061E");
    pub const INITIALIZER_LENGTH_INCORRECT: Code = Code::new("EL1062E");
    pub const MULTIDIM_ARRAY_INITIALIZER_NOT_SUPPORTED: Code = Code::new("EL1063E");
    pub const OPERAND_NOT_INCREMENTABLE: Code = Code::new("EL1066E");
    pub const OPERAND_NOT_DECREMENTABLE: Code = Code::new("EL1067E");
    pub const DIVISION_BY_ZERO: Code = Code::new("EL1072E");
    pub const INVALID_PATTERN: Code = Code::new("EL1073E");
    pub const BETWEEN_RIGHT_OPERAND_MUST_BE_TWO_ELEMENT_LIST: Code = Code::new("EL1074E");
    pub const MAX_REGEX_LENGTH_EXCEEDED: Code = Code::new("EL1075E");
    pub const MAX_REPEATED_TEXT_SIZE_EXCEEDED: Code = Code::new("EL1076E");
    pub const MAX_ARRAY_ELEMENTS_THRESHOLD_EXCEEDED: Code = Code::new("EL1077E");
    pub const MAX_EVALUATION_DEPTH_EXCEEDED: Code = Code::new("EL1083E");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // Tokenizer
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");

    // Parser
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const SYNTAX_VALIDATION_PASSED: Code = Code::new("I041");

    // Evaluation
    pub const EVALUATION_COMPLETE: Code = Code::new("I050");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

use self::Severity::{Critical, High, Low, Medium};

const FIX_EXPRESSION: &str = "Correct the expression text at the reported position";
const CHECK_CONTEXT: &str = "Check the evaluation context supplies the referenced value";
const CHECK_OPERANDS: &str = "Check the operand types used by the expression";
const RAISE_LIMIT: &str = "Simplify the expression or raise the limit in the build profile";

#[rustfmt::skip]
const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new("ERR001", "System", Critical, "Internal error: {0}", "File a bug report with the failing expression"),
    ErrorMetadata::new("ERR002", "System", Critical, "Initialization failure: {0}", "Check logging configuration and environment variables"),

    // Lexical
    ErrorMetadata::new("EL1035E", "Lexical", High, "The value '{0}' cannot be parsed as an int", FIX_EXPRESSION),
    ErrorMetadata::new("EL1036E", "Lexical", High, "The value '{0}' cannot be parsed as a long", FIX_EXPRESSION),
    ErrorMetadata::new("EL1037E", "Lexical", High, "The value '{0}' cannot be parsed as a double", FIX_EXPRESSION),
    ErrorMetadata::new("EL1045E", "Lexical", High, "Cannot find terminating \" for string", "Close the string literal with a double quote"),
    ErrorMetadata::new("EL1046E", "Lexical", High, "Cannot find terminating ' for string", "Close the string literal with a single quote"),
    ErrorMetadata::new("EL1047E", "Lexical", High, "A real number must be prefixed by zero, it cannot start with just '.'", "Write the number as 0.n"),
    ErrorMetadata::new("EL1048E", "Lexical", High, "Real number cannot be suffixed with a long (L or l) suffix", FIX_EXPRESSION),
    ErrorMetadata::new("EL1065E", "Lexical", High, "Unexpected escape character", "Escape quotes by doubling them instead of using a backslash"),
    ErrorMetadata::new("EL1068E", "Lexical", High, "Missing expected character '{0}'", FIX_EXPRESSION),
    ErrorMetadata::new("EL1069E", "Lexical", High, "Unsupported character '{0}' ({1}) encountered in expression", FIX_EXPRESSION),
    ErrorMetadata::new("EL1079E", "Lexical", Critical, "SpEL expression is too long, exceeding the threshold of '{0}' characters", RAISE_LIMIT),
    ErrorMetadata::new("EL1080E", "Lexical", Critical, "SpEL expression produces more than '{0}' tokens", RAISE_LIMIT),
    ErrorMetadata::new("EL1081E", "Lexical", High, "String literal exceeds the maximum size of '{0}' characters", RAISE_LIMIT),
    ErrorMetadata::new("EL1084E", "Lexical", High, "Identifier exceeds the maximum length of '{0}' characters", RAISE_LIMIT),

    // Syntax
    ErrorMetadata::new("EL1041E", "Syntax", High, "After parsing a valid expression, there is still more data in the expression: '{0}'", "Remove the trailing text or join it with an operator"),
    ErrorMetadata::new("EL1042E", "Syntax", High, "Problem parsing right operand", "Supply an operand after the operator"),
    ErrorMetadata::new("EL1043E", "Syntax", High, "Unexpected token. Expected '{0}' but was '{1}'", FIX_EXPRESSION),
    ErrorMetadata::new("EL1044E", "Syntax", High, "Unexpectedly ran out of input", "Complete the expression"),
    ErrorMetadata::new("EL1049E", "Syntax", High, "Unexpected data after '.': '{0}'", "Follow '.' with a property, method, selection or projection"),
    ErrorMetadata::new("EL1050E", "Syntax", High, "The arguments '(...)' for the constructor call are missing", "Add an argument list after the type name"),
    ErrorMetadata::new("EL1051E", "Syntax", High, "Unexpectedly ran out of arguments", "Close the argument list"),
    ErrorMetadata::new("EL1053E", "Syntax", High, "Problem parsing left operand", "Supply an operand before the operator"),
    ErrorMetadata::new("EL1070E", "Syntax", High, "Expected a bean name after the bean reference symbol", "Write @name or @'quoted.name'"),
    ErrorMetadata::new("EL1071E", "Syntax", High, "A required selection expression has not been specified", "Put an expression between the brackets"),
    ErrorMetadata::new("EL1082E", "Syntax", Critical, "Expression nesting exceeds the maximum depth of '{0}'", RAISE_LIMIT),
    ErrorMetadata::new("EL1085E", "Syntax", High, "Argument list exceeds the maximum of '{0}' arguments", RAISE_LIMIT),

    // Evaluation
    ErrorMetadata::new("EL1001E", "Evaluation", Medium, "Type conversion problem, cannot convert from {0} to {1}", CHECK_OPERANDS),
    ErrorMetadata::new("EL1002E", "Evaluation", Medium, "Constructor call: No suitable constructor found on type {0} for arguments {1}", CHECK_OPERANDS),
    ErrorMetadata::new("EL1004E", "Evaluation", Medium, "Method call: Method {0} cannot be found on type {1}", CHECK_OPERANDS),
    ErrorMetadata::new("EL1005E", "Evaluation", Medium, "Type cannot be found '{0}'", "Use a type known to the type locator"),
    ErrorMetadata::new("EL1006E", "Evaluation", Medium, "Function '{0}' could not be found", "Register the function with the evaluation context"),
    ErrorMetadata::new("EL1007E", "Evaluation", Medium, "Property or field '{0}' cannot be found on null", "Use the safe navigation operator '?.'"),
    ErrorMetadata::new("EL1008E", "Evaluation", Medium, "Property or field '{0}' cannot be found on object of type '{1}'", CHECK_CONTEXT),
    ErrorMetadata::new("EL1009E", "Evaluation", Medium, "Property or field '{0}' cannot be set on null", CHECK_CONTEXT),
    ErrorMetadata::new("EL1010E", "Evaluation", Medium, "Property or field '{0}' is not writable on object of type '{1}'", CHECK_CONTEXT),
    ErrorMetadata::new("EL1011E", "Evaluation", Medium, "Method call: Attempted to call method {0} on null context object", "Use the safe navigation operator '?.'"),
    ErrorMetadata::new("EL1012E", "Evaluation", Medium, "Cannot index into a null value", "Use the safe navigation operator '?.['"),
    ErrorMetadata::new("EL1013E", "Evaluation", Medium, "Cannot compare instances of {0} and {1}", CHECK_OPERANDS),
    ErrorMetadata::new("EL1015E", "Evaluation", Medium, "Incorrect number of arguments for function '{0}': {1} supplied but function takes {2}", CHECK_OPERANDS),
    ErrorMetadata::new("EL1016E", "Evaluation", Medium, "Variable '{0}' does not reference a function and cannot be invoked", CHECK_CONTEXT),
    ErrorMetadata::new("EL1025E", "Evaluation", Medium, "The collection has '{0}' elements, index '{1}' is invalid", CHECK_OPERANDS),
    ErrorMetadata::new("EL1027E", "Evaluation", Medium, "Indexing into type '{0}' is not supported", CHECK_OPERANDS),
    ErrorMetadata::new("EL1029E", "Evaluation", Medium, "A problem occurred whilst attempting to invoke method '{0}' on type '{1}': '{2}'", CHECK_OPERANDS),
    ErrorMetadata::new("EL1030E", "Evaluation", Medium, "The operator '{0}' is not supported between objects of type '{1}' and '{2}'", CHECK_OPERANDS),
    ErrorMetadata::new("EL1033E", "Evaluation", Medium, "Cannot perform selection on input data of type '{0}'", "Select over a list or map"),
    ErrorMetadata::new("EL1034E", "Evaluation", Medium, "Projection is not supported on the type '{0}'", "Project over a list or map"),
    ErrorMetadata::new("EL1052E", "Evaluation", Medium, "Unable to grow collection beyond '{0}' elements", "Raise the maximum auto-grow size"),
    ErrorMetadata::new("EL1055E", "Evaluation", Medium, "The expression component '{0}' is not assignable", "Assign to a variable, property or indexed element"),
    ErrorMetadata::new("EL1057E", "Evaluation", Medium, "No bean resolver registered in the context to resolve access to bean '{0}'", "Register a bean resolver with the evaluation context"),
    ErrorMetadata::new("EL1058E", "Evaluation", Medium, "A problem occurred when trying to resolve bean '{0}': '{1}'", CHECK_CONTEXT),
    ErrorMetadata::new("EL1060E", "Evaluation", Medium, "Result of selection criteria is not boolean", "Make the selection expression produce true or false"),
    ErrorMetadata::new("EL1061E", "Evaluation", Medium, "A required array dimension has not been specified", "Give a size or an initializer"),
    ErrorMetadata::new("EL1062E", "Evaluation", Medium, "Array initializer size does not match array dimensions", FIX_EXPRESSION),
    ErrorMetadata::new("EL1063E", "Evaluation", Medium, "Using an initializer to build a multi-dimensional array is not currently supported", FIX_EXPRESSION),
    ErrorMetadata::new("EL1066E", "Evaluation", Medium, "Operand '{0}' is not incrementable", CHECK_OPERANDS),
    ErrorMetadata::new("EL1067E", "Evaluation", Medium, "Operand '{0}' is not decrementable", CHECK_OPERANDS),
    ErrorMetadata::new("EL1072E", "Evaluation", Medium, "Division by zero", CHECK_OPERANDS),
    ErrorMetadata::new("EL1073E", "Evaluation", Medium, "Pattern '{0}' is not valid: {1}", "Fix the regular expression"),
    ErrorMetadata::new("EL1074E", "Evaluation", Medium, "Right operand for the 'between' operator has to be a two-element list", "Write x between {low, high}"),
    ErrorMetadata::new("EL1075E", "Evaluation", High, "The regular expression is too long, exceeding the threshold of '{0}' characters", RAISE_LIMIT),
    ErrorMetadata::new("EL1076E", "Evaluation", High, "Repeated text is too long, exceeding the threshold of '{0}' characters", RAISE_LIMIT),
    ErrorMetadata::new("EL1077E", "Evaluation", High, "Array declares too many elements, exceeding the threshold of '{0}'", RAISE_LIMIT),
    ErrorMetadata::new("EL1083E", "Evaluation", Critical, "Evaluation nesting exceeds the maximum depth of '{0}'", RAISE_LIMIT),

    // Success
    ErrorMetadata::new("I001", "Success", Low, "Operation completed successfully", "Continue"),
    ErrorMetadata::new("I004", "Success", Low, "Logging system initialized", "Continue"),
    ErrorMetadata::new("I020", "Success", Low, "Tokenization completed", "Continue to parsing"),
    ErrorMetadata::new("I040", "Success", Low, "AST construction completed", "Continue to evaluation"),
    ErrorMetadata::new("I041", "Success", Low, "Expression parsed and validated", "Continue to evaluation"),
    ErrorMetadata::new("I050", "Success", Low, "Expression evaluated", "Continue"),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Get the message template for a code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for a code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// Render the message template of `code` with its insertion arguments.
///
/// Slots without a matching argument are left as written.
pub fn format_message(code: Code, inserts: &[String]) -> String {
    let mut message = get_description(code.as_str()).to_string();
    for (index, insert) in inserts.iter().enumerate() {
        message = message.replace(&format!("{{{}}}", index), insert);
    }
    message
}
