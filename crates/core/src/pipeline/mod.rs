pub mod detect_image_use_case;
pub mod display_label;
