use super::results::ResultRecord;

/// One page of results, borrowed from the paginator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultsView<'a> {
    /// Records on the current page, in result order.
    pub records: &'a [ResultRecord],
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_records: usize,
    /// Index of `records[0]` within the full result list.
    pub offset: usize,
}

impl ResultsView<'_> {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Splits result records into fixed-size pages. Page numbers are 1-based
/// and always clamped into range.
#[derive(Debug)]
pub struct ResultPaginator {
    records: Vec<ResultRecord>,
    page_size: usize,
    page: usize,
}

impl Default for ResultPaginator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ResultPaginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            page_size: page_size.max(1),
            page: 1,
        }
    }

    /// Replace the records and go back to page 1.
    pub fn configure(&mut self, records: Vec<ResultRecord>, page_size: usize) -> ResultsView<'_> {
        self.records = records;
        self.page_size = page_size.max(1);
        self.page = 1;
        self.view()
    }

    pub fn go_to(&mut self, page: usize) -> ResultsView<'_> {
        self.page = page.clamp(1, self.total_pages());
        self.view()
    }

    pub fn next(&mut self) -> ResultsView<'_> {
        self.go_to(self.page.saturating_add(1))
    }

    pub fn previous(&mut self) -> ResultsView<'_> {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn first(&mut self) -> ResultsView<'_> {
        self.go_to(1)
    }

    pub fn last(&mut self) -> ResultsView<'_> {
        self.go_to(self.total_pages())
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size).max(1)
    }

    pub fn current_slice(&self) -> &[ResultRecord] {
        let start = self.offset().min(self.records.len());
        let end = start.saturating_add(self.page_size).min(self.records.len());
        &self.records[start..end]
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn view(&self) -> ResultsView<'_> {
        ResultsView {
            records: self.current_slice(),
            page: self.page,
            total_pages: self.total_pages(),
            page_size: self.page_size,
            total_records: self.records.len(),
            offset: self.offset(),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<ResultRecord> {
        (0..n)
            .map(|i| ResultRecord::Failure {
                source_file_name: format!("f{i}.pdf"),
                error_message: "bad".to_string(),
            })
            .collect()
    }

    fn names(view: &ResultsView<'_>) -> Vec<String> {
        view.records
            .iter()
            .map(|r| r.source_file_name().to_string())
            .collect()
    }

    #[test]
    fn go_to_past_the_end_clamps_to_last_page() {
        let mut pager = ResultPaginator::default();
        pager.configure(records(7), 3);

        let view = pager.go_to(10);
        assert_eq!(view.page, 3);
        assert_eq!(view.total_pages, 3);
        assert_eq!(names(&view), ["f6.pdf"]);
        assert_eq!(pager.current_slice().len(), 1);
    }

    #[test]
    fn go_to_zero_clamps_to_first_page() {
        let mut pager = ResultPaginator::default();
        pager.configure(records(7), 3);
        pager.go_to(2);
        let view = pager.go_to(0);
        assert_eq!(view.page, 1);
        assert_eq!(names(&view), ["f0.pdf", "f1.pdf", "f2.pdf"]);
    }

    #[test]
    fn configure_resets_to_first_page() {
        let mut pager = ResultPaginator::default();
        pager.configure(records(10), 2);
        pager.go_to(4);
        let view = pager.configure(records(4), 2);
        assert_eq!(view.page, 1);
        assert_eq!(view.total_pages, 2);
        assert!(view.has_next());
        assert!(!view.has_previous());
    }

    #[test]
    fn empty_records_have_one_empty_page() {
        let mut pager = ResultPaginator::default();
        let view = pager.configure(Vec::new(), 5);
        assert_eq!(view.total_pages, 1);
        assert!(view.records.is_empty());
        assert!(view.is_empty());

        let view = pager.go_to(3);
        assert_eq!(view.page, 1);
        assert!(view.records.is_empty());
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let mut pager = ResultPaginator::default();
        let view = pager.configure(records(3), 0);
        assert_eq!(view.page_size, 1);
        assert_eq!(view.total_pages, 3);
    }

    #[test]
    fn next_and_previous_walk_and_stop_at_edges() {
        let mut pager = ResultPaginator::default();
        pager.configure(records(5), 2);

        assert_eq!(pager.previous().page, 1);
        assert_eq!(pager.next().page, 2);
        let view = pager.last();
        assert_eq!((view.page, view.offset), (3, 4));
        assert_eq!(pager.next().page, 3);
        assert_eq!(pager.first().page, 1);
    }

    #[test]
    fn single_page_when_page_size_is_unbounded() {
        let mut pager = ResultPaginator::default();
        let view = pager.configure(records(12), usize::MAX);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.records.len(), 12);
    }

    #[test]
    fn clear_drops_records() {
        let mut pager = ResultPaginator::default();
        pager.configure(records(5), 2);
        pager.go_to(3);
        pager.clear();
        assert!(pager.view().is_empty());
        assert_eq!(pager.page(), 1);
    }
}
