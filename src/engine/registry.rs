// src/engine/registry.rs

use std::fmt;

use crate::dag::{Plan, TaskBundle};
use crate::errors::{AssetpipeError, Result};
use crate::types::{Action, Category};

/// Every task name a user can request, with the plan it stands for.
///
/// Names keep their registration order so listings read top-down.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<(String, Plan)>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The aggregate `default*` tasks plus the four names of every category.
    pub fn standard() -> Self {
        let bundle = TaskBundle::for_category;

        let clean = across_categories(|c| bundle(c).clean);
        let compile = across_categories(|c| bundle(c).compile);
        let clean_compile = Plan::series([clean.clone(), compile.clone()]);
        let watch = Plan::series([
            bundle(Category::ImageResponsive).clean_compile,
            Plan::parallel(Category::ALL.iter().map(|c| bundle(*c).watch)),
        ]);

        let mut registry = Self::new();
        registry.register("default", clean_compile);
        registry.register("default:clean", clean);
        registry.register("default:compile", compile);
        registry.register("default:watch", watch);

        for category in Category::ALL {
            let name = category.name();
            let b = bundle(category);
            registry.register(name, b.clean_compile);
            registry.register(format!("{name}:{}", Action::Clean), b.clean);
            registry.register(format!("{name}:{}", Action::Compile), b.compile);
            registry.register(format!("{name}:watch"), b.watch);
        }
        registry
    }

    /// Add or replace a task.
    pub fn register(&mut self, name: impl Into<String>, plan: Plan) {
        let name = name.into();
        match self.tasks.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = plan,
            None => self.tasks.push((name, plan)),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Plan> {
        self.tasks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| AssetpipeError::TaskNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Plan)> {
        self.tasks.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Combine the requested tasks into one plan: in parallel by default,
    /// one after another when `series` is set.
    pub fn resolve(&self, names: &[String], series: bool) -> Result<Plan> {
        let mut plans = names
            .iter()
            .map(|n| self.get(n).cloned())
            .collect::<Result<Vec<_>>>()?;

        if plans.len() == 1 {
            return Ok(plans.remove(0));
        }
        Ok(if series {
            Plan::Series(plans)
        } else {
            Plan::Parallel(plans)
        })
    }
}

impl fmt::Display for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.names().map(str::len).max().unwrap_or(0);
        for (name, plan) in self.iter() {
            writeln!(f, "{name:<width$}  {plan}")?;
        }
        Ok(())
    }
}

/// Every category's operation in parallel, with image-responsive strictly
/// before image (both write into overlapping destinations).
fn across_categories(op: impl Fn(Category) -> Plan) -> Plan {
    Plan::parallel([
        op(Category::Style),
        op(Category::Script),
        op(Category::Font),
        Plan::series([op(Category::ImageResponsive), op(Category::Image)]),
        op(Category::Data),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_aggregates_and_category_names() {
        let registry = TaskRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(&names[..4], &["default", "default:clean", "default:compile", "default:watch"]);
        assert_eq!(names.len(), 4 + 4 * Category::ALL.len());
        for name in ["style", "script:clean", "image-responsive:watch", "data:compile"] {
            assert!(registry.get(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn default_clean_orders_images() {
        let registry = TaskRegistry::standard();
        assert_eq!(
            registry.get("default:clean").unwrap().to_string(),
            "parallel(style:clean, script:clean, font:clean, \
             series(image-responsive:clean, image:clean), data:clean)"
        );
    }

    #[test]
    fn unknown_task_is_reported() {
        let registry = TaskRegistry::standard();
        let err = registry.get("styles").unwrap_err();
        assert!(matches!(err, AssetpipeError::TaskNotFound(ref n) if n == "styles"));
        assert!(registry
            .resolve(&["style".into(), "nope".into()], false)
            .is_err());
    }

    #[test]
    fn resolve_combines_requested_tasks() {
        let registry = TaskRegistry::standard();
        let single = registry.resolve(&["font".into()], false).unwrap();
        assert_eq!(&single, registry.get("font").unwrap());

        let both = registry
            .resolve(&["font:clean".into(), "data:clean".into()], true)
            .unwrap();
        assert_eq!(both.to_string(), "series(font:clean, data:clean)");
    }
}
