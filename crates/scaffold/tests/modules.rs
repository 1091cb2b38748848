use scaffold::features;

#[test]
fn default_build_enables_both_modules() {
    assert!(features::is_enabled("info"));
    assert!(features::is_enabled("openapi"));
    assert!(!features::is_enabled("licensing"));
}

#[test]
fn modules_are_listed_in_registration_order() {
    let names: Vec<_> = scaffold::modules().iter().map(|module| module.info().name).collect();
    assert_eq!(names, ["scaffold-info", "scaffold-openapi"]);
}
