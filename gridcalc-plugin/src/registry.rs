//! Plugin Registry

use crate::{FunctionPlugin, FunctionMeta};
use crate::EvalContext;
use gridcalc_core::{Value, CalcError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Central plugin registry
pub struct PluginRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    /// Registered function names, sorted
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn call_function(&self, name: &str, args: &[Value], ctx: &EvalContext) -> Value {
        match self.get_function(name) {
            Some(f) => {
                debug!(function = name, args = args.len(), "calling function");
                // A panicking plugin must not take the session down with it
                let result = match panic::catch_unwind(AssertUnwindSafe(|| f.call(args, ctx))) {
                    Ok(v) => v,
                    Err(_) => {
                        error!(function = name, "function panicked");
                        return Value::Error(
                            CalcError::internal(format!("{}() panicked", name)).in_function(name),
                        );
                    }
                };
                if let Value::Error(ref e) = result {
                    debug!(function = name, code = %e.code, "function returned error");
                }
                result
            }
            None => {
                // Find similar function names for better error message
                let similar = self.find_similar_functions(name);
                let mut err = CalcError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Similar: {}. Use help() for full list.",
                        suggestions.join(", ")
                    ));
                }
                Value::Error(err)
            }
        }
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.functions.keys()
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                if score > 0 {
                    Some((func_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then by name so output is stable
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        // Sharing one or two letters is noise
        if common >= 3 {
            score += common * 2;
        }

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn help(&self, name: Option<&str>) -> Value {
        match name {
            Some(n) => self.help_for(n),
            None => self.general_help(),
        }
    }

    fn help_for(&self, name: &str) -> Value {
        match self.functions.get(&name.to_lowercase()) {
            Some(f) => Value::Object(Self::function_to_help(f.meta())),
            None => Value::Error(CalcError::not_found(name)),
        }
    }

    fn general_help(&self) -> Value {
        let mut help = HashMap::new();

        let mut funcs_by_cat: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, f) in &self.functions {
            let cat = f.meta().category.to_string();
            funcs_by_cat.entry(cat).or_default().push(name.clone());
        }
        help.insert("functions".to_string(),
            Value::Object(funcs_by_cat.into_iter()
                .map(|(k, mut v)| {
                    v.sort();
                    (k, Value::List(v.into_iter().map(Value::Text).collect()))
                })
                .collect()));

        help.insert("hint".to_string(),
            Value::Text("Call help('function_name') for detailed help.".to_string()));

        Value::Object(help)
    }

    fn function_to_help(meta: FunctionMeta) -> HashMap<String, Value> {
        let mut help = HashMap::new();
        help.insert("name".to_string(), Value::Text(meta.name.to_string()));
        help.insert("type".to_string(), Value::Text("function".to_string()));
        help.insert("description".to_string(), Value::Text(meta.description.to_string()));
        help.insert("usage".to_string(), Value::Text(meta.usage.to_string()));
        help.insert("returns".to_string(), Value::Text(meta.returns.to_string()));
        help.insert("category".to_string(), Value::Text(meta.category.to_string()));
        help.insert("args".to_string(), Value::List(
            meta.args.iter().map(|a| {
                let mut arg = HashMap::new();
                arg.insert("name".to_string(), Value::Text(a.name.to_string()));
                arg.insert("type".to_string(), Value::Text(a.typ.to_string()));
                arg.insert("description".to_string(), Value::Text(a.description.to_string()));
                arg.insert("optional".to_string(), Value::Bool(a.optional));
                Value::Object(arg)
            }).collect()
        ));
        help.insert("examples".to_string(), Value::List(
            meta.examples.iter().map(|e| Value::Text(e.to_string())).collect()
        ));
        help.insert("related".to_string(), Value::List(
            meta.related.iter().map(|r| Value::Text(r.to_string())).collect()
        ));
        help
    }

    /// List functions sorted by name, optionally restricted to one category
    pub fn list_functions(&self, category: Option<&str>) -> Value {
        let mut metas: Vec<FunctionMeta> = self.functions.values()
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by_key(|m| m.name);

        Value::List(metas.into_iter()
            .map(|meta| {
                let mut obj = HashMap::new();
                obj.insert("name".to_string(), Value::Text(meta.name.to_string()));
                obj.insert("description".to_string(), Value::Text(meta.description.to_string()));
                obj.insert("usage".to_string(), Value::Text(meta.usage.to_string()));
                obj.insert("category".to_string(), Value::Text(meta.category.to_string()));
                Value::Object(obj)
            })
            .collect())
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgMeta;
    use gridcalc_core::{codes, Severity};

    struct DoubleFn;

    static DOUBLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to double")];

    impl FunctionPlugin for DoubleFn {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "double", description: "Double a number", usage: "double(x)",
                args: &DOUBLE_ARGS, returns: "Number", examples: &[],
                category: "test", related: &[],
            }
        }

        fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
            match args.first().and_then(Value::as_number) {
                Some(x) => Value::Number(x * 2.0),
                None => Value::Error(CalcError::arg_type("double", "x", "Number", "other")),
            }
        }
    }

    struct BrokenFn;

    impl FunctionPlugin for BrokenFn {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "broken", description: "Always panics", usage: "broken()",
                args: &[], returns: "Number", examples: &[],
                category: "test", related: &[],
            }
        }

        fn call(&self, _args: &[Value], _ctx: &EvalContext) -> Value {
            panic!("index out of bounds")
        }
    }

    fn registry() -> Arc<PluginRegistry> {
        Arc::new(PluginRegistry::new().with_function(DoubleFn))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let reg = registry();
        assert!(reg.get_function("DOUBLE").is_some());
        assert_eq!(reg.function_names(), vec!["double".to_string()]);
    }

    #[test]
    fn test_call_function() {
        let reg = registry();
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("double", &[Value::Number(21.0)], &ctx);
        assert_eq!(result.as_number(), Some(42.0));
    }

    #[test]
    fn test_unknown_function_suggests_similar() {
        let reg = registry();
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("doubel", &[], &ctx);
        let err = result.as_error().unwrap();
        assert!(err.is(codes::UNDEFINED_FUNC));
        assert!(err.suggestion.as_deref().unwrap_or("").contains("double"));
    }

    #[test]
    fn test_help() {
        let reg = registry();
        let help = reg.help(Some("double"));
        assert_eq!(help.get("usage").as_text(), Some("double(x)"));
        assert!(reg.help(Some("missing")).is_error());
        assert!(reg.help(None).get("functions").as_object().is_some());
    }

    #[test]
    fn test_general_help_has_no_usage_line() {
        let help = registry().help(None);
        assert!(help.get("usage").is_error());
        assert!(help.get("hint").as_text().unwrap().contains("help('function_name')"));
    }

    #[test]
    fn test_panicking_function_becomes_internal_error() {
        let reg = Arc::new(PluginRegistry::new().with_function(DoubleFn).with_function(BrokenFn));
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("broken", &[], &ctx);
        let err = result.as_error().unwrap();
        assert!(err.is(codes::INTERNAL));
        assert_eq!(err.severity, Severity::Fatal);

        // The registry keeps working afterwards
        let result = reg.call_function("double", &[Value::Number(2.0)], &ctx);
        assert_eq!(result.as_number(), Some(4.0));
    }

    #[test]
    fn test_list_functions_by_category() {
        let reg = registry();
        assert_eq!(reg.list_functions(Some("test")).as_list().map(|l| l.len()), Some(1));
        assert_eq!(reg.list_functions(Some("other")).as_list().map(|l| l.len()), Some(0));
    }
}
