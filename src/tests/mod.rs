mod test_reaper_loop;
