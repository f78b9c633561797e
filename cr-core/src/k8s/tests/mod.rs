mod util_test;

use rstest::*;

use super::*;
