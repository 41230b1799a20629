mod test_curve_basic;
mod test_frame_basic;
