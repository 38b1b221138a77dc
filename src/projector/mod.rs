//! Deriving the active-configuration label and reordering entries around it.
//!
//! These are pure functions over the externally-owned build state. Absence
//! at any point is valid data and degrades to the `"null"` label; nothing
//! here ever fails or mutates its inputs.

use crate::model::CodeModel;

/// The label shown when any part of the active configuration is unknown.
pub const NULL_LABEL: &str = "null";

/// Builds the `"{project} / {target} / {buildType}"` display label.
///
/// If ANY of the three parts is absent the whole label collapses to the
/// literal string `"null"` — a single token, not a three-part string with
/// nulls substituted per slot. Callers rely on this exact behavior to detect
/// "no active configuration".
pub fn make_config_name(
    project_name: Option<&str>,
    target_name: Option<&str>,
    build_type_name: Option<&str>,
) -> String {
    match (project_name, target_name, build_type_name) {
        (Some(project), Some(target), Some(build_type)) => {
            format!("{} / {} / {}", project, target, build_type)
        }
        _ => NULL_LABEL.to_string(),
    }
}

/// Derives the active-configuration label from the code model and the
/// currently selected target/build-type names.
///
/// The configuration is matched by name against the selected build type; the
/// project is the one containing a target named after the selected target.
/// Total: any missing link in the chain yields the `"null"` label.
pub fn derive_active_label(
    model: Option<&CodeModel>,
    active_target_name: Option<&str>,
    active_build_type_name: Option<&str>,
) -> String {
    let active_project_name = model
        .zip(active_build_type_name)
        .and_then(|(model, build_type)| {
            model
                .configurations
                .iter()
                .find(|config| config.name == build_type)
        })
        .zip(active_target_name)
        .and_then(|(config, target)| {
            config
                .projects
                .iter()
                .find(|project| project.targets.iter().any(|t| t.name == target))
        })
        .map(|project| project.name.as_str());

    make_config_name(
        active_project_name,
        active_target_name,
        active_build_type_name,
    )
}

/// Moves the entry whose name matches `active_label` to the front, keeping
/// the relative order of all other entries. When no entry matches, the
/// sequence is returned unchanged (no entry is synthesized). Entries are
/// never duplicated or dropped.
pub fn reorder_active_first<T, F>(mut entries: Vec<T>, active_label: &str, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if let Some(index) = entries.iter().position(|e| name_of(e) == active_label) {
        let active = entries.remove(index);
        entries.insert(0, active);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Configuration, Project, Target};

    fn model() -> CodeModel {
        CodeModel {
            configurations: vec![
                Configuration {
                    name: "Debug".to_string(),
                    projects: vec![
                        Project {
                            name: "lib_project".to_string(),
                            targets: vec![Target {
                                name: "lib".to_string(),
                            }],
                        },
                        Project {
                            name: "app_project".to_string(),
                            targets: vec![Target {
                                name: "main".to_string(),
                            }],
                        },
                    ],
                },
                Configuration {
                    name: "Release".to_string(),
                    projects: vec![Project {
                        name: "app_project".to_string(),
                        targets: vec![Target {
                            name: "main".to_string(),
                        }],
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_make_config_name_all_present() {
        assert_eq!(
            make_config_name(Some("app"), Some("main"), Some("Debug")),
            "app / main / Debug"
        );
    }

    #[test]
    fn test_make_config_name_collapses_on_any_absent_slot() {
        // Whole-label collapse, not per-slot substitution
        assert_eq!(make_config_name(None, Some("main"), Some("Debug")), "null");
        assert_eq!(make_config_name(Some("app"), None, Some("Debug")), "null");
        assert_eq!(make_config_name(Some("app"), Some("main"), None), "null");
        assert_eq!(make_config_name(None, None, None), "null");
    }

    #[test]
    fn test_derive_active_label_full_chain() {
        assert_eq!(
            derive_active_label(Some(&model()), Some("main"), Some("Debug")),
            "app_project / main / Debug"
        );
        assert_eq!(
            derive_active_label(Some(&model()), Some("lib"), Some("Debug")),
            "lib_project / lib / Debug"
        );
    }

    #[test]
    fn test_derive_active_label_null_target_collapses_even_with_full_model() {
        // The model has a "Debug" configuration, but the target name is
        // absent, so the whole label is "null".
        assert_eq!(derive_active_label(Some(&model()), None, Some("Debug")), "null");
    }

    #[test]
    fn test_derive_active_label_missing_model_or_lookups() {
        assert_eq!(derive_active_label(None, Some("main"), Some("Debug")), "null");
        // Unknown build type: no configuration matches
        assert_eq!(
            derive_active_label(Some(&model()), Some("main"), Some("MinSizeRel")),
            "null"
        );
        // Unknown target: no project contains it
        assert_eq!(
            derive_active_label(Some(&model()), Some("ghost"), Some("Debug")),
            "null"
        );
    }

    #[test]
    fn test_derive_active_label_never_mutates_model() {
        let m = model();
        let before = m.clone();
        let _ = derive_active_label(Some(&m), Some("main"), Some("Debug"));
        assert_eq!(m, before);
    }

    #[derive(Debug, PartialEq, Clone)]
    struct Entry {
        name: String,
    }

    fn entries(names: &[&str]) -> Vec<Entry> {
        names
            .iter()
            .map(|n| Entry {
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_reorder_moves_active_to_front_preserving_rest() {
        let reordered = reorder_active_first(entries(&["A", "B", "C"]), "B", |e| &e.name);
        assert_eq!(reordered, entries(&["B", "A", "C"]));
    }

    #[test]
    fn test_reorder_no_match_is_identity() {
        let reordered = reorder_active_first(entries(&["A"]), "Z", |e| &e.name);
        assert_eq!(reordered, entries(&["A"]));

        let reordered = reorder_active_first(entries(&["A", "B"]), "null", |e| &e.name);
        assert_eq!(reordered, entries(&["A", "B"]));
    }

    #[test]
    fn test_reorder_active_already_first() {
        let reordered = reorder_active_first(entries(&["A", "B"]), "A", |e| &e.name);
        assert_eq!(reordered, entries(&["A", "B"]));
    }

    #[test]
    fn test_reorder_neither_duplicates_nor_drops() {
        let reordered = reorder_active_first(entries(&["A", "B", "C", "D"]), "D", |e| &e.name);
        assert_eq!(reordered.len(), 4);
        assert_eq!(reordered, entries(&["D", "A", "B", "C"]));
    }

    #[test]
    fn test_reorder_empty_sequence() {
        let reordered = reorder_active_first(entries(&[]), "A", |e| &e.name);
        assert!(reordered.is_empty());
    }
}
