//! Dashboard statistics service

use chrono::{Datelike, Duration, Utc};

use crate::{
    api::stats::{AnalyticsData, AnalyticsOverview, CategoryStat, MonthlyStat, OwnerStats, RecentActivity},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Admin dashboard analytics: counts, category distribution, monthly
    /// additions for the last six months, and recent activity.
    pub async fn analytics(&self) -> AppResult<AnalyticsData> {
        let total_books = self.repository.books.count().await?;
        let role_counts = self.repository.users.role_counts().await?;

        let category_counts = self.repository.books.category_counts().await?;
        let category_stats: Vec<CategoryStat> = category_counts
            .iter()
            .map(|(name, count)| CategoryStat {
                name: name.clone(),
                value: *count,
            })
            .collect();
        let top_categories = category_stats.iter().take(5).cloned().collect();

        let six_months_ago = Utc::now() - Duration::days(6 * 30);
        let monthly = self.repository.books.monthly_additions(six_months_ago).await?;
        let month_names = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let monthly_stats = monthly
            .into_iter()
            .map(|(month, count)| MonthlyStat {
                month: format!("{} {}", month_names[month.month0() as usize], month.year()),
                books: count,
            })
            .collect();

        let recent_books = self.repository.books.recent(10).await?;
        let recent_users = self.repository.users.recent(5).await?;

        Ok(AnalyticsData {
            overview: AnalyticsOverview {
                total_books,
                total_users: role_counts.regular_users,
                total_admins: role_counts.admins + role_counts.owners,
                total_members: role_counts.total,
            },
            category_stats,
            monthly_stats,
            top_categories,
            recent_activity: RecentActivity {
                books: recent_books,
                users: recent_users,
            },
        })
    }

    /// Owner dashboard totals
    pub async fn owner_stats(&self) -> AppResult<OwnerStats> {
        let role_counts = self.repository.users.role_counts().await?;
        let total_books = self.repository.books.count().await?;
        let total_borrows = self.repository.borrows.count_active().await?;

        Ok(OwnerStats {
            total_users: role_counts.total,
            total_admins: role_counts.admins,
            total_books,
            total_borrows,
        })
    }
}
