//! Channel-level PFD/PFH math for 1oo1 and 1oo2 architectures
//!
//! Implements the IEC 61508 low-demand formulas with a beta-factor model
//! for the redundant case. The DU/DD split is driven by a per-lane ratio
//! pair; a ratio pair summing to zero or less has no sensible split and is
//! a configuration error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assumptions::Assumptions;

/// DU/DD ratio pair for one lane
///
/// Only the relative weight matters; the pair is normalized before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuDdRatio {
    pub du: f64,
    pub dd: f64,
}

impl DuDdRatio {
    pub fn new(du: f64, dd: f64) -> Self {
        Self { du, dd }
    }
}

impl Default for DuDdRatio {
    fn default() -> Self {
        Self { du: 0.6, dd: 0.4 }
    }
}

/// Computed metrics for a single channel or a redundant architecture
///
/// For 1oo2 results the λ fields hold the summed totals of both channels,
/// not the independent portions left after the beta split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    /// Combined dangerous failure rate (1/h)
    pub lambda_total: f64,
    /// Dangerous-undetected share of `lambda_total` (1/h)
    pub lambda_du: f64,
    /// Dangerous-detected share of `lambda_total` (1/h)
    pub lambda_dd: f64,
    /// Average probability of failure on demand
    pub pfd: f64,
    /// Probability of dangerous failure per hour (1/h)
    pub pfh: f64,
}

/// Invalid DU/DD ratio configuration
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("DU/DD ratios must sum to a positive value.")]
pub struct RatioError;

/// Metrics for a 1oo1 channel given λ_total and the lane's DU/DD ratios
pub fn calculate_single_channel(
    lambda_total: f64,
    ratio: DuDdRatio,
    assumptions: &Assumptions,
) -> Result<ChannelMetrics, RatioError> {
    let (lambda_du, lambda_dd) = split_lambda(lambda_total, ratio)?;
    let pfd = lambda_du * assumptions.low_demand_factor() + lambda_dd * assumptions.mttr;
    let pfh = lambda_du;

    Ok(ChannelMetrics {
        lambda_total,
        lambda_du,
        lambda_dd,
        pfd,
        pfh,
    })
}

/// Metrics for a 1oo2 architecture using the beta-factor model
///
/// The two channels are summed into one λ_total and split with the lane
/// ratio, then the beta factors carve out the common-cause portions. The
/// independent contribution uses the channel-equivalent (t_CE) and
/// group-equivalent (t_GE) exposure times; the common-cause contribution is
/// added unconditionally. Commutative over the order of `lambda_totals`.
pub fn calculate_one_out_of_two(
    lambda_totals: &[f64],
    ratio: DuDdRatio,
    assumptions: &Assumptions,
) -> Result<ChannelMetrics, RatioError> {
    let total_lambda: f64 = lambda_totals.iter().sum();
    let (lambda_du_total, lambda_dd_total) = split_lambda(total_lambda, ratio)?;

    let ti = assumptions.ti;
    let mttr = assumptions.mttr;
    let beta = assumptions.beta;
    let beta_d = assumptions.beta_d;

    let lambda_du_ind = (1.0 - beta) * lambda_du_total;
    let lambda_dd_ind = (1.0 - beta_d) * lambda_dd_total;
    let lambda_d_ind = lambda_du_ind + lambda_dd_ind;

    let (pfd_ind, pfh_ind) = if lambda_d_ind > 0.0 {
        let w_du = lambda_du_ind / lambda_d_ind;
        let w_dd = lambda_dd_ind / lambda_d_ind;
        let t_ce = w_du * (ti / 2.0 + mttr) + w_dd * mttr;
        let t_ge = w_du * (ti / 3.0 + mttr) + w_dd * mttr;
        let pfd_ind = 2.0 * lambda_d_ind * lambda_d_ind * t_ce * t_ge;
        let pfh_ind = 2.0 * lambda_d_ind * lambda_du_ind * t_ce;
        (pfd_ind, pfh_ind)
    } else {
        (0.0, 0.0)
    };

    let pfd_ccf = beta * lambda_du_total * (ti / 2.0 + mttr) + beta_d * lambda_dd_total * mttr;
    let pfh_ccf = beta * lambda_du_total;

    Ok(ChannelMetrics {
        lambda_total: total_lambda,
        lambda_du: lambda_du_total,
        lambda_dd: lambda_dd_total,
        pfd: pfd_ind + pfd_ccf,
        pfh: pfh_ind + pfh_ccf,
    })
}

/// Split λ_total into DU and DD portions according to the ratio pair
pub fn split_lambda(lambda_total: f64, ratio: DuDdRatio) -> Result<(f64, f64), RatioError> {
    let total_ratio = ratio.du + ratio.dd;
    if total_ratio <= 0.0 {
        return Err(RatioError);
    }
    let lambda_du = lambda_total * ratio.du / total_ratio;
    let lambda_dd = lambda_total * ratio.dd / total_ratio;
    Ok((lambda_du, lambda_dd))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assumptions() -> Assumptions {
        Assumptions::new(8760.0, 8.0, 0.1, 0.02)
    }

    #[test]
    fn test_single_channel_matches_formula() {
        let asm = assumptions();
        let ratio = DuDdRatio::new(0.65, 0.35);
        let metrics = calculate_single_channel(1.5e-5, ratio, &asm).unwrap();

        let lambda_du = 1.5e-5 * 0.65;
        let lambda_dd = 1.5e-5 * 0.35;
        let expected_pfd = lambda_du * (asm.ti / 2.0 + asm.mttr) + lambda_dd * asm.mttr;

        assert!((metrics.lambda_du - lambda_du).abs() < 1e-18);
        assert!((metrics.lambda_dd - lambda_dd).abs() < 1e-18);
        assert!((metrics.pfd - expected_pfd).abs() < 1e-12);
        assert!((metrics.pfh - lambda_du).abs() < 1e-18);
    }

    #[test]
    fn test_single_channel_is_linear_in_lambda() {
        let asm = assumptions();
        let ratio = DuDdRatio::new(0.7, 0.3);
        let base = calculate_single_channel(2.0e-6, ratio, &asm).unwrap();
        let scaled = calculate_single_channel(6.0e-6, ratio, &asm).unwrap();
        assert!((scaled.pfd - 3.0 * base.pfd).abs() < 1e-12);
        assert!((scaled.pfh - 3.0 * base.pfh).abs() < 1e-18);
        assert!((scaled.lambda_du - 3.0 * base.lambda_du).abs() < 1e-18);
    }

    #[test]
    fn test_zero_ratio_sum_is_rejected() {
        let asm = assumptions();
        assert_eq!(
            calculate_single_channel(1.0e-5, DuDdRatio::new(0.0, 0.0), &asm),
            Err(RatioError)
        );
        assert_eq!(
            calculate_one_out_of_two(&[1.0e-5], DuDdRatio::new(-0.5, 0.2), &asm),
            Err(RatioError)
        );
    }

    #[test]
    fn test_one_out_of_two_matches_beta_model() {
        let asm = assumptions();
        let ratio = DuDdRatio::new(0.6, 0.4);
        let lambdas = [1.0e-5, 1.2e-5];
        let metrics = calculate_one_out_of_two(&lambdas, ratio, &asm).unwrap();

        let total: f64 = lambdas.iter().sum();
        let lambda_du_total = total * 0.6;
        let lambda_dd_total = total * 0.4;
        let lambda_du_ind = (1.0 - asm.beta) * lambda_du_total;
        let lambda_dd_ind = (1.0 - asm.beta_d) * lambda_dd_total;
        let lambda_d_ind = lambda_du_ind + lambda_dd_ind;
        let w_du = lambda_du_ind / lambda_d_ind;
        let w_dd = lambda_dd_ind / lambda_d_ind;
        let t_ce = w_du * (asm.ti / 2.0 + asm.mttr) + w_dd * asm.mttr;
        let t_ge = w_du * (asm.ti / 3.0 + asm.mttr) + w_dd * asm.mttr;
        let pfd_ind = 2.0 * lambda_d_ind * lambda_d_ind * t_ce * t_ge;
        let pfh_ind = 2.0 * lambda_d_ind * lambda_du_ind * t_ce;
        let pfd_ccf = asm.beta * lambda_du_total * (asm.ti / 2.0 + asm.mttr)
            + asm.beta_d * lambda_dd_total * asm.mttr;
        let pfh_ccf = asm.beta * lambda_du_total;

        assert!((metrics.lambda_du - lambda_du_total).abs() < 1e-18);
        assert!((metrics.lambda_dd - lambda_dd_total).abs() < 1e-18);
        assert!((metrics.pfd - (pfd_ind + pfd_ccf)).abs() < 1e-12);
        assert!((metrics.pfh - (pfh_ind + pfh_ccf)).abs() < 1e-15);
    }

    #[test]
    fn test_one_out_of_two_is_commutative() {
        let asm = assumptions();
        let ratio = DuDdRatio::new(0.7, 0.3);
        let forward = calculate_one_out_of_two(&[3.0e-6, 9.0e-6], ratio, &asm).unwrap();
        let reversed = calculate_one_out_of_two(&[9.0e-6, 3.0e-6], ratio, &asm).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_one_out_of_two_with_zero_beta_has_no_ccf_terms() {
        let asm = Assumptions::new(8760.0, 8.0, 0.0, 0.0);
        let ratio = DuDdRatio::new(0.7, 0.3);
        let metrics = calculate_one_out_of_two(&[7.5e-6, 7.5e-6], ratio, &asm).unwrap();

        let total = 1.5e-5;
        let lambda_du = total * 0.7;
        let lambda_dd = total * 0.3;
        let lambda_d = lambda_du + lambda_dd;
        let w_du = lambda_du / lambda_d;
        let w_dd = lambda_dd / lambda_d;
        let t_ce = w_du * (asm.ti / 2.0 + asm.mttr) + w_dd * asm.mttr;
        let t_ge = w_du * (asm.ti / 3.0 + asm.mttr) + w_dd * asm.mttr;
        let expected_pfd = 2.0 * lambda_d * lambda_d * t_ce * t_ge;
        let expected_pfh = 2.0 * lambda_d * lambda_du * t_ce;

        assert!((metrics.pfd - expected_pfd).abs() < 1e-12);
        assert!((metrics.pfh - expected_pfh).abs() < 1e-15);
    }

    #[test]
    fn test_one_out_of_two_with_zero_lambda_keeps_ccf_branch() {
        // λ = 0 leaves only the (zero) CCF contribution; nothing divides by zero.
        let asm = assumptions();
        let metrics =
            calculate_one_out_of_two(&[0.0, 0.0], DuDdRatio::default(), &asm).unwrap();
        assert_eq!(metrics.pfd, 0.0);
        assert_eq!(metrics.pfh, 0.0);
        assert_eq!(metrics.lambda_total, 0.0);
    }
}
