//! Natural-language prompt built from division statistics

use crate::db::reports::DivisionStats;

pub fn build_prompt(stats: &DivisionStats) -> String {
    format!(
        "You are a sports data analyst for the 35th National Youth Sports Festival 2025 in Sri Lanka.

Analyze the following data for {division}, {district}:

**Submission Statistics:**
- Total Submissions: {submissions}
- Team Sports Events: {team}
- Swimming Events: {swimming}
- Track & Field Events: {track}

**Participation:**
- Total Participants: {total}
- Male Participants: {male}
- Female Participants: {female}

Provide a brief analysis (3-4 sentences) covering:
1. Overall participation level
2. Gender balance
3. Sport category distribution
4. One actionable recommendation

Keep the response concise and professional.",
        division = stats.division_name,
        district = stats.district_name,
        submissions = stats.total_submissions,
        team = stats.team_sports_count,
        swimming = stats.swimming_count,
        track = stats.track_field_count,
        total = stats.total_participants,
        male = stats.male_participants,
        female = stats.female_participants,
    )
}
