use proptest::prelude::*;
use wmforge_edit_model::EditSettings;

fn any_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        -100.0f64..100.0,
        Just(0.0),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn sanitized_settings_satisfy_compiler_invariants(
        opacity in any_f64(),
        scale in any_f64(),
        speed in any_f64(),
        start in any_f64(),
        end in any_f64(),
        ext in "[. &>;]{0,2}[a-z0-9]{0,4}[ |]?",
    ) {
        let raw = EditSettings {
            opacity,
            scale,
            video_speed: speed,
            start_time: start,
            end_time: end,
            file_extension: ext,
            ..EditSettings::default()
        };
        let clean = raw.sanitized();

        prop_assert!((0.0..=1.0).contains(&clean.opacity));
        prop_assert!(clean.scale > 0.0 && clean.scale.is_finite());
        prop_assert!(clean.video_speed > 0.0 && clean.video_speed.is_finite());
        prop_assert!(clean.start_time >= 0.0 && clean.end_time >= 0.0);
        prop_assert!(!clean.file_extension.is_empty());
        prop_assert!(!clean.file_extension.starts_with('.'));
        prop_assert!(clean
            .file_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
        prop_assert!(clean.effective_duration() >= 0.0);
    }

    #[test]
    fn sanitizing_twice_changes_nothing(
        opacity in any_f64(),
        speed in any_f64(),
        ext in "[. &>;]{0,2}[a-z0-9]{0,4}[ |]?",
    ) {
        let raw = EditSettings {
            opacity,
            video_speed: speed,
            file_extension: ext,
            ..EditSettings::default()
        };
        let once = raw.sanitized();
        prop_assert_eq!(once.sanitized(), once);
    }
}
