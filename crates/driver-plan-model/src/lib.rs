// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod activity;
pub mod builder;
pub mod common;
pub mod driver;
pub mod err;
pub mod generator;
pub mod instance;
pub mod mask;
pub mod robustness;
pub mod rules;
pub mod salary;
pub mod satisfaction;
pub mod shift;

pub mod prelude {
    pub use crate::activity::{Activity, ActivityRequest};
    pub use crate::builder::InstanceBuilder;
    pub use crate::common::{
        ActivityIndex, DriverIndex, ExternalTypeIndex, Identifier, IdentifierMarkerName,
        SalaryIndex, StationIndex,
    };
    pub use crate::driver::{
        Driver, DriverKind, ExternalDriver, ExternalDriverType, HomeTravel, InternalDriver,
        InternalDriverRequest,
    };
    pub use crate::err::InstanceError;
    pub use crate::generator::{GeneratorConfig, InstanceGenerator};
    pub use crate::instance::Instance;
    pub use crate::robustness::RobustnessConfig;
    pub use crate::rules::{RulesConfig, ShiftTypeRule};
    pub use crate::salary::{SalaryRateBlock, SalarySettings};
    pub use crate::satisfaction::{CriterionMeasure, CriterionScale, SatisfactionCriterion};
    pub use crate::shift::{DriverTypeShiftInfo, MainShiftInfo, ShiftTable};
}
