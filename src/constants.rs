pub const DEFAULT_AUTHORING_BASE_URL: &str = "https://snowstorm-test.msal.gob.ar/MAIN/concepts";
pub const DEFAULT_VALIDATE_URL: &str =
    "https://r4.ontoserver.csiro.au/fhir/CodeSystem/$validate-code";
pub const SNOMED_CT_SYSTEM: &str = "http://snomed.info/sct";
pub const FHIR_JSON: &str = "application/fhir+json";
pub const DEFAULT_USER_AGENT: &str = "snomed-tools/0.1";

pub const TARGET_CODE_COLUMN: &str = "Target code";
pub const EXPRESSION_COLUMN: &str = "Post_Coordinated_Expression";
pub const STRIPPED_EXPRESSION_COLUMN: &str = "Post_Coordinated_Expression_Stripped";
pub const VALIDATION_RESULT_COLUMN: &str = "Validation_Result";
pub const ERROR_COLUMN: &str = "Error";

pub const PROCESSED_SUFFIX: &str = "_processed";
pub const STRIPPED_SUFFIX: &str = "_stripped";
pub const VALIDATED_SUFFIX: &str = "_validated";
