//! Context composition.
//!
//! A cmi5 session hands out a context template that every statement must
//! carry. Statements may also bring their own context; the two are merged
//! field by field:
//!
//! - scalars: the caller's value wins, the template fills gaps
//! - `extensions`: key-wise union, the caller wins on collision
//! - context activity lists: caller items first, then template items, no
//!   de-duplication

use crate::model::{Activity, Context, ContextActivities, Extensions};

/// Merge `caller` over `template`. Without a caller context this is a copy
/// of the template.
pub fn merge_context(template: &Context, caller: Option<&Context>) -> Context {
    let Some(caller) = caller else {
        return template.clone();
    };

    Context {
        registration: pick(&caller.registration, &template.registration),
        instructor: pick(&caller.instructor, &template.instructor),
        team: pick(&caller.team, &template.team),
        context_activities: merge_activities(
            caller.context_activities.as_ref(),
            template.context_activities.as_ref(),
        ),
        revision: pick(&caller.revision, &template.revision),
        platform: pick(&caller.platform, &template.platform),
        language: pick(&caller.language, &template.language),
        statement: pick(&caller.statement, &template.statement),
        extensions: merge_extensions(caller.extensions.as_ref(), template.extensions.as_ref()),
    }
}

fn pick<T: Clone>(caller: &Option<T>, template: &Option<T>) -> Option<T> {
    caller.as_ref().or(template.as_ref()).cloned()
}

fn merge_extensions(caller: Option<&Extensions>, template: Option<&Extensions>) -> Option<Extensions> {
    match (caller, template) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(caller), Some(template)) => {
            let mut merged = template.clone();
            for (key, value) in caller {
                merged.insert(key.clone(), value.clone());
            }
            Some(merged)
        }
    }
}

fn merge_activities(
    caller: Option<&ContextActivities>,
    template: Option<&ContextActivities>,
) -> Option<ContextActivities> {
    match (caller, template) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(caller), Some(template)) => Some(ContextActivities {
            parent: concat(&caller.parent, &template.parent),
            grouping: concat(&caller.grouping, &template.grouping),
            category: concat(&caller.category, &template.category),
            other: concat(&caller.other, &template.other),
        }),
    }
}

fn concat(caller: &Option<Vec<Activity>>, template: &Option<Vec<Activity>>) -> Option<Vec<Activity>> {
    match (caller, template) {
        (None, None) => None,
        (caller, template) => Some(
            caller
                .iter()
                .chain(template.iter())
                .flatten()
                .cloned()
                .collect(),
        ),
    }
}

/// Session-bound composer: the captured template plus the launch registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextComposer {
    template: Context,
    registration: Option<String>,
}

impl ContextComposer {
    pub fn new(template: Context, registration: Option<String>) -> Self {
        Self {
            template,
            registration,
        }
    }

    pub fn template(&self) -> &Context {
        &self.template
    }

    /// Merge `caller` over the template. The launch registration is filled in
    /// when neither side set one.
    pub fn compose(&self, caller: Option<&Context>) -> Context {
        let mut context = merge_context(&self.template, caller);
        if context.registration.is_none() {
            context.registration = self.registration.clone();
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Actor;
    use serde_json::json;

    fn extensions(value: serde_json::Value) -> Option<Extensions> {
        match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn categories(ids: &[&str]) -> Option<ContextActivities> {
        Some(ContextActivities {
            category: Some(ids.iter().map(|id| Activity::new(*id)).collect()),
            ..ContextActivities::default()
        })
    }

    mod merge {
        use super::*;

        #[test]
        fn without_caller_copies_template() {
            let template = Context {
                registration: Some("R".to_string()),
                platform: Some("web".to_string()),
                ..Context::default()
            };
            assert_eq!(merge_context(&template, None), template);
        }

        #[test]
        fn extensions_are_unioned() {
            let template = Context {
                registration: Some("R".to_string()),
                extensions: extensions(json!({"a": 1})),
                ..Context::default()
            };
            let caller = Context {
                extensions: extensions(json!({"b": 2})),
                ..Context::default()
            };

            let merged = merge_context(&template, Some(&caller));
            assert_eq!(merged.extensions, extensions(json!({"a": 1, "b": 2})));
            assert_eq!(merged.registration.as_deref(), Some("R"));
        }

        #[test]
        fn caller_extension_wins_on_collision() {
            let template = Context {
                extensions: extensions(json!({"a": 1, "keep": true})),
                ..Context::default()
            };
            let caller = Context {
                extensions: extensions(json!({"a": 9})),
                ..Context::default()
            };

            let merged = merge_context(&template, Some(&caller));
            assert_eq!(merged.extensions, extensions(json!({"a": 9, "keep": true})));
        }

        #[test]
        fn category_lists_put_caller_first() {
            let template = Context {
                context_activities: categories(&["X"]),
                ..Context::default()
            };
            let caller = Context {
                context_activities: categories(&["Y"]),
                ..Context::default()
            };

            let merged = merge_context(&template, Some(&caller));
            let ids: Vec<String> = merged
                .context_activities
                .unwrap()
                .category
                .unwrap()
                .into_iter()
                .map(|a| a.id)
                .collect();
            assert_eq!(ids, vec!["Y", "X"]);
        }

        #[test]
        fn lists_are_not_deduplicated() {
            let template = Context {
                context_activities: categories(&["X"]),
                ..Context::default()
            };
            let caller = Context {
                context_activities: categories(&["X"]),
                ..Context::default()
            };

            let merged = merge_context(&template, Some(&caller));
            assert_eq!(merged.context_activities.unwrap().category.unwrap().len(), 2);
        }

        #[test]
        fn one_sided_lists_are_kept() {
            let template = Context {
                context_activities: Some(ContextActivities {
                    grouping: Some(vec![Activity::new("G")]),
                    ..ContextActivities::default()
                }),
                ..Context::default()
            };
            let caller = Context {
                context_activities: categories(&["Y"]),
                ..Context::default()
            };

            let activities = merge_context(&template, Some(&caller))
                .context_activities
                .unwrap();
            assert_eq!(activities.grouping.unwrap()[0].id, "G");
            assert_eq!(activities.category.unwrap()[0].id, "Y");
            assert!(activities.parent.is_none());
        }

        #[test]
        fn caller_scalars_win() {
            let template = Context {
                registration: Some("R".to_string()),
                platform: Some("lms".to_string()),
                language: Some("en".to_string()),
                instructor: Some(Actor::mbox("Teacher", "t@example.com")),
                ..Context::default()
            };
            let caller = Context {
                platform: Some("app".to_string()),
                instructor: Some(Actor::mbox("Other", "o@example.com")),
                ..Context::default()
            };

            let merged = merge_context(&template, Some(&caller));
            assert_eq!(merged.platform.as_deref(), Some("app"));
            assert_eq!(merged.language.as_deref(), Some("en"));
            assert_eq!(merged.registration.as_deref(), Some("R"));
            assert_eq!(merged.instructor.unwrap().name.as_deref(), Some("Other"));
        }
    }

    mod composer {
        use super::*;

        #[test]
        fn fills_registration_without_caller_context() {
            let composer = ContextComposer::new(Context::default(), Some("launch-reg".to_string()));
            let context = composer.compose(None);
            assert_eq!(context.registration.as_deref(), Some("launch-reg"));
        }

        #[test]
        fn template_registration_beats_launch_registration() {
            let template = Context {
                registration: Some("template-reg".to_string()),
                ..Context::default()
            };
            let composer = ContextComposer::new(template, Some("launch-reg".to_string()));
            assert_eq!(
                composer.compose(None).registration.as_deref(),
                Some("template-reg")
            );
        }

        #[test]
        fn caller_registration_beats_everything() {
            let composer = ContextComposer::new(
                Context {
                    registration: Some("template-reg".to_string()),
                    ..Context::default()
                },
                Some("launch-reg".to_string()),
            );
            let caller = Context {
                registration: Some("caller-reg".to_string()),
                ..Context::default()
            };
            assert_eq!(
                composer.compose(Some(&caller)).registration.as_deref(),
                Some("caller-reg")
            );
        }

        #[test]
        fn no_registration_anywhere_stays_empty() {
            let composer = ContextComposer::default();
            assert_eq!(composer.compose(None), Context::default());
        }
    }
}
