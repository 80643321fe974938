//! Pattern compilation
//!
//! Turns a stage's include globs, its exclude globs and the configured
//! always-excluded (template-filtered) files into one ordered instruction
//! set for the copy engine.

use handoff_copy::PatternSet;

/// Compile include, exclude and always-excluded lists into a [`PatternSet`].
///
/// Order: `includes` as given, then each of `excludes` negated, then each of
/// `always_excluded` negated.
pub fn compile<I, E, F>(includes: &[I], excludes: &[E], always_excluded: &[F]) -> PatternSet
where
    I: AsRef<str>,
    E: AsRef<str>,
    F: AsRef<str>,
{
    let mut set = PatternSet::new();
    for pattern in includes {
        set.push_include(pattern.as_ref());
    }
    for pattern in excludes {
        set.push_exclude(pattern.as_ref());
    }
    for file in always_excluded {
        set.push_exclude(file.as_ref());
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_order_is_includes_excludes_filtered() {
        let set = compile(
            &["js/**", "images/**"],
            &["js/dev/**", "!images/raw/**"],
            &["index.html", "config.js"],
        );

        assert_eq!(
            set.patterns(),
            vec![
                "js/**",
                "images/**",
                "!js/dev/**",
                "!images/raw/**",
                "!index.html",
                "!config.js",
            ]
        );
    }

    #[test]
    fn test_filtered_files_appended_without_excludes() {
        let set = compile(&["**"], NONE, &["WEB-INF/web.xml"]);
        assert_eq!(set.patterns(), vec!["**", "!WEB-INF/web.xml"]);
    }

    #[test]
    fn test_no_excludes() {
        let set = compile(&["**"], NONE, NONE);
        assert_eq!(set.patterns(), vec!["**"]);
    }

    #[test]
    fn test_dot_slash_prefix_normalised() {
        let set = compile(&["./**"], &["./secret.txt"], NONE);
        assert_eq!(set.patterns(), vec!["**", "!secret.txt"]);
    }
}
