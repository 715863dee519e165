pub mod box_outline_annotator;
