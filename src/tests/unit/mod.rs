//! Unit tests spanning more than one wizard component

mod wizard_controller_tests;
