//! Argument checks that run between tag resolution and the block handler.

use serde_json::Value;

use blockflow_registry::BlockDescriptor;
use blockflow_types::BlockError;

/// Checks resolved arguments against the descriptor's parameter schema.
///
/// Missing required parameters and unexpected parameters (including
/// attempts to set engine-supplied ones) are argument errors; a rejection
/// from the descriptor's validator is a type error.
pub fn validate_arguments(
    descriptor: &BlockDescriptor,
    args: &serde_json::Map<String, Value>,
) -> Result<(), BlockError> {
    for required in &descriptor.required_params {
        if !args.contains_key(required) {
            return Err(BlockError::invalid_argument(format!(
                "missing required parameter '{required}'"
            )));
        }
    }
    for name in args.keys() {
        if descriptor.is_global_param(name) {
            return Err(BlockError::invalid_argument(format!(
                "parameter '{name}' is reserved"
            )));
        }
        if !descriptor.accepts_param(name) {
            return Err(BlockError::invalid_argument(format!(
                "unexpected parameter '{name}'"
            )));
        }
    }
    if let Some(validator) = &descriptor.validator {
        validator.validate(args).map_err(BlockError::InvalidType)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockflow_types::NodeStatus;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn missing_required_parameter_is_an_argument_error() {
        let descriptor = BlockDescriptor::builder("sum")
            .required_param("value1")
            .required_param("value2")
            .build()
            .unwrap();
        let error = validate_arguments(&descriptor, &args(&[("value1", json!(1))])).unwrap_err();
        assert_eq!(error.status(), NodeStatus::InvalidArgument);
    }

    #[test]
    fn unexpected_parameter_is_rejected_unless_variadic() {
        let strict = BlockDescriptor::builder("echo").optional_param("value").build().unwrap();
        let error = validate_arguments(&strict, &args(&[("other", json!(1))])).unwrap_err();
        assert_eq!(error.status(), NodeStatus::InvalidArgument);

        let loose = BlockDescriptor::builder("echo").variadic().build().unwrap();
        assert!(validate_arguments(&loose, &args(&[("other", json!(1))])).is_ok());
    }

    #[test]
    fn engine_supplied_parameters_cannot_be_set_by_callers() {
        let descriptor = BlockDescriptor::builder("set")
            .global_param("variables")
            .variadic()
            .build()
            .unwrap();
        let error =
            validate_arguments(&descriptor, &args(&[("variables", json!({}))])).unwrap_err();
        assert_eq!(error.status(), NodeStatus::InvalidArgument);
    }

    #[test]
    fn validator_rejection_is_a_type_error() {
        let descriptor = BlockDescriptor::builder("sum")
            .required_param("value1")
            .validator(|args: &serde_json::Map<String, Value>| {
                if args["value1"].is_number() {
                    Ok(())
                } else {
                    Err("value1 must be a number".into())
                }
            })
            .build()
            .unwrap();
        let error =
            validate_arguments(&descriptor, &args(&[("value1", json!("two"))])).unwrap_err();
        assert_eq!(error.status(), NodeStatus::InvalidType);
    }
}
