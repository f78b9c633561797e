
use cr_testutils::*;
use rstest::*;

use super::*;
use crate::config::MergePolicy;
use crate::errors::DatasourceError;
use crate::tests::make_store;
