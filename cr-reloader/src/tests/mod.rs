
use cr_core::prelude::*;
use cr_testutils::*;
use rstest::*;

use super::*;
