//! Labour market
//!
//! Retirees leave their jobs, then unemployed working-age households are
//! shuffled and matched to open positions, best-paid positions first.

use crate::models::population::Population;
use crate::rng::RngManager;

/// Clear the month's labour market; returns the number of hires
pub fn run_labor_market(
    population: &mut Population,
    retirement_age: u32,
    rng: &mut RngManager,
) -> usize {
    for index in 0..population.households.len() {
        let hh = &mut population.households[index];
        if !hh.is_alive() || hh.age() < retirement_age || !hh.is_employed() {
            continue;
        }
        let employer = hh.employer();
        hh.lose_job();
        if let Some(firm) = employer.and_then(|f| population.firms.get_mut(f)) {
            firm.remove_employee(index);
        }
    }

    let mut seekers: Vec<usize> = population
        .households
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_alive() && !h.is_employed() && h.age() < retirement_age)
        .map(|(i, _)| i)
        .collect();
    rng.shuffle(&mut seekers);

    // (firm, wage) per open position; stable sort keeps firm order among equal wages
    let mut vacancies: Vec<(usize, f64)> = population
        .firms
        .iter()
        .enumerate()
        .flat_map(|(i, f)| std::iter::repeat((i, f.wage_level())).take(f.vacancies()))
        .collect();
    vacancies.sort_by(|a, b| b.1.total_cmp(&a.1));

    let hires = seekers.len().min(vacancies.len());
    for (&seeker, &(firm, wage)) in seekers.iter().zip(vacancies.iter()) {
        population.households[seeker].hire(firm, wage);
        population.firms[firm].add_employee(seeker);
    }

    if hires > 0 {
        tracing::debug!("Labour market filled {} positions", hires);
    }
    hires
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::firm::{Firm, InvestmentPlan};
    use crate::models::household::{Household, HouseholdParams};

    fn firm(wage: f64, staff: &[usize], target: usize) -> Firm {
        let mut f = Firm::new(wage, 0.0, InvestmentPlan::default());
        for &s in staff {
            f.add_employee(s);
        }
        f.set_target_employees(target);
        f
    }

    #[test]
    fn test_retirees_leave_and_seekers_fill_best_paid_first() {
        let mut households = vec![
            Household::new(70, 0.0, HouseholdParams::default()),
            Household::new(30, 0.0, HouseholdParams::default()),
        ];
        households[0].hire(0, 2_000.0);
        let mut population = Population::new(
            households,
            vec![firm(2_000.0, &[0], 1), firm(3_000.0, &[], 1)],
        );
        let mut rng = RngManager::new(7);

        let hires = run_labor_market(&mut population, 65, &mut rng);

        assert_eq!(hires, 1);
        assert!(!population.households[0].is_employed());
        assert_eq!(population.households[1].employer(), Some(1));
        assert_eq!(population.households[1].wage(), 3_000.0);
        assert!(population.firms[0].employees().is_empty());
    }

    #[test]
    fn test_no_vacancies_no_hires() {
        let mut population = Population::new(
            vec![Household::new(30, 0.0, HouseholdParams::default())],
            vec![firm(2_000.0, &[], 0)],
        );
        let mut rng = RngManager::new(1);
        assert_eq!(run_labor_market(&mut population, 65, &mut rng), 0);
    }
}
