//! # Polynomial Operations Example
//!
//! This example demonstrates the exact arithmetic used by the CAD engine.
//! It covers:
//! - Sparse multivariate polynomials
//! - Resultants and discriminants
//! - Square-free factorisation
//! - Real root isolation
//!
//! ## See Also
//! - [`Polynomial`](qecad_math::polynomial::Polynomial)

use qecad_math::MathResult;
use qecad_math::polynomial::Polynomial;
use qecad_math::polynomial::factorization::factor;
use qecad_math::polynomial::resultant::{discriminant, resultant};
use qecad_math::polynomial::root_isolation::isolate_real_roots;

fn main() -> MathResult<()> {
    println!("=== QeCAD Math: Polynomial Operations ===\n");

    // circle x0^2 + x1^2 - 1 and line x1 - x0
    let circle = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
    let line = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-1, &[(0, 1)])]);
    println!("circle = {}", circle);
    println!("line   = {}", line);

    let disc = discriminant(&circle, 1)?;
    println!("disc_x1(circle) = {}", disc);
    let res = resultant(&circle, &line, 1)?;
    println!("res_x1(circle, line) = {}", res);

    let fac = factor(&disc)?;
    println!("\nfactors of the discriminant (constant {}):", fac.constant);
    for (f, m) in &fac.factors {
        println!("  ({})^{}", f, m);
    }

    println!("\nreal roots of {}:", res);
    for root in isolate_real_roots(&res, 0)? {
        println!("  in [{}, {}]", root.lower(), root.upper());
    }
    Ok(())
}
